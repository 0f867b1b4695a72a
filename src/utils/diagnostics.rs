use crate::utils::error::FragmentError;
use std::sync::{Mutex, PoisonError};

/// 診斷通道：每個失敗都寫入 tracing，並保留一份供呼叫端檢查
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Mutex<Vec<FragmentError>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, error: &FragmentError) {
        tracing::error!(
            kind = ?error.kind(),
            component = error.component(),
            "❌ {}",
            error
        );
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error.clone());
    }

    pub fn entries(&self) -> Vec<FragmentError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::FailureKind;

    #[test]
    fn test_report_records_entry() {
        let diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());

        diagnostics.report(&FragmentError::UnregisteredComponent {
            name: "ghost".to_string(),
        });

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics.entries()[0].kind(),
            FailureKind::UnregisteredComponent
        );
    }
}
