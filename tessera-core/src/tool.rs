//! Tool table
//!
//! The set of selectable tools is fixed at startup; selection only moves
//! the active index. Offsets and limits are consumed by the motion layer,
//! the heater index by the machine context when routing temperature
//! commands.

use heapless::Vec;

use crate::config::{ToolConfig, MAX_TOOLS};

/// Tool selection errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ToolError {
    /// Index outside the configured table
    NoSuchTool(u8),
    /// A machine needs at least one tool
    EmptyTable,
}

/// Immutable tool set with one active selection
#[derive(Debug)]
pub struct ToolTable {
    tools: Vec<ToolConfig, MAX_TOOLS>,
    active: u8,
}

impl ToolTable {
    /// Build a table; tool 0 starts active
    ///
    /// Rejects an empty list so an active tool always exists.
    pub fn new(tools: Vec<ToolConfig, MAX_TOOLS>) -> Result<Self, ToolError> {
        if tools.is_empty() {
            return Err(ToolError::EmptyTable);
        }
        Ok(Self { tools, active: 0 })
    }

    /// Number of configured tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Look up a tool by index
    pub fn get(&self, index: u8) -> Result<&ToolConfig, ToolError> {
        self.tools
            .get(usize::from(index))
            .ok_or(ToolError::NoSuchTool(index))
    }

    /// The active tool's index
    pub fn active_index(&self) -> u8 {
        self.active
    }

    /// The active tool
    pub fn active(&self) -> &ToolConfig {
        // Construction rejects empty tables and select() bounds-checks,
        // so the active index always resolves
        &self.tools[usize::from(self.active)]
    }

    /// Make `index` the active tool and return it
    pub fn select(&mut self, index: u8) -> Result<&ToolConfig, ToolError> {
        if usize::from(index) >= self.tools.len() {
            return Err(ToolError::NoSuchTool(index));
        }
        self.active = index;
        Ok(&self.tools[usize::from(index)])
    }
}
