//! Page-number pagination shared by the list operations.

use serde::{Deserialize, Serialize};

/// A 1-based page request. Out-of-range values are clamped by
/// [`PageRequest::clamp`], never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
  pub page: u32,
  pub size: u32,
}

impl PageRequest {
  pub fn new(page: u32, size: u32) -> Self { Self { page, size } }

  /// Pin `page` to at least 1 and `size` into `1..=max_size`, substituting
  /// `default_size` for a zero size.
  pub fn clamp(self, default_size: u32, max_size: u32) -> Self {
    let size = match self.size {
      0 => default_size,
      s => s.min(max_size),
    };
    Self { page: self.page.max(1), size: size.max(1) }
  }

  pub fn offset(&self) -> u64 { u64::from(self.page.saturating_sub(1)) * u64::from(self.size) }

  pub fn limit(&self) -> u64 { u64::from(self.size) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub page:  u32,
  pub size:  u32,
  /// Total number of rows the page was cut from.
  pub total: u64,
}

impl<T> Page<T> {
  pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
    Self { items, page: request.page, size: request.size, total }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clamp_fills_defaults() {
    let p = PageRequest::new(0, 0).clamp(20, 100);
    assert_eq!(p, PageRequest::new(1, 20));
  }

  #[test]
  fn clamp_caps_size() {
    let p = PageRequest::new(3, 500).clamp(20, 100);
    assert_eq!(p.size, 100);
    assert_eq!(p.offset(), 200);
  }
}
