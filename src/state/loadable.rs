use super::error::ConsoleError;

/// The `{data, is_loading, error}` triple every loading container exposes
#[derive(Debug, Clone, PartialEq)]
pub struct Loadable<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub error: Option<ConsoleError>,
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }
}

impl<T> Loadable<T> {
    pub fn loaded(data: T) -> Self {
        Self {
            data: Some(data),
            is_loading: false,
            error: None,
        }
    }

    /// Mark a request as in flight. Existing data is kept until it resolves.
    pub fn start_loading(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// Apply the outcome of a request. A failure clears the data.
    pub fn resolve(&mut self, result: Result<T, ConsoleError>) {
        self.is_loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(err) => {
                self.data = None;
                self.error = Some(err);
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some() && !self.is_loading
    }
}
