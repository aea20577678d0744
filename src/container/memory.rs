use super::{AttrValue, Container, ContainerError, Dataset};

/// A container that lives entirely in memory.
///
/// Useful for fixtures and for callers that obtained a [`Dataset`] some other way.
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    dataset: Dataset,
}

impl MemoryContainer {
    /// Wrap a dataset
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    /// Unwrap into the (possibly patched) dataset
    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }
}

impl Container for MemoryContainer {
    fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    fn put_variable_attribute(
        &mut self,
        variable: &str,
        name: &str,
        value: AttrValue,
    ) -> Result<(), ContainerError> {
        let var = self
            .dataset
            .variable_mut(variable)
            .ok_or_else(|| ContainerError::MissingVariable(variable.to_string()))?;
        var.attributes.insert(name.to_string(), value);
        Ok(())
    }

    fn delete_variable_attribute(
        &mut self,
        variable: &str,
        name: &str,
    ) -> Result<(), ContainerError> {
        let var = self
            .dataset
            .variable_mut(variable)
            .ok_or_else(|| ContainerError::MissingVariable(variable.to_string()))?;
        var.attributes.remove(name);
        Ok(())
    }
}
