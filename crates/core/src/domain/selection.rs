use serde::{Deserialize, Serialize};

use crate::domain::catalog::{FiberTierId, GbAllowance};

/// One desired mobile line. Carries no price; pricing is derived by
/// resolution against the catalog or against a bundle slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileLineRequest {
    pub gb: GbAllowance,
}

/// Caller-held configurator state: the chosen fiber tier plus the desired
/// mobile lines. An immutable snapshot of this is handed to the engine on
/// every recompute; there is no shared session state behind it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffSelection {
    pub fiber_id: FiberTierId,
    pub mobile_lines: Vec<MobileLineRequest>,
}

impl TariffSelection {
    pub fn new(fiber_id: FiberTierId) -> Self {
        Self { fiber_id, mobile_lines: Vec::new() }
    }

    pub fn add_line(&mut self, gb: GbAllowance) {
        self.mobile_lines.push(MobileLineRequest { gb });
    }

    pub fn remove_line(&mut self, index: usize) {
        if index < self.mobile_lines.len() {
            self.mobile_lines.remove(index);
        }
    }

    pub fn set_line_gb(&mut self, index: usize, gb: GbAllowance) {
        if let Some(line) = self.mobile_lines.get_mut(index) {
            line.gb = gb;
        }
    }
}
