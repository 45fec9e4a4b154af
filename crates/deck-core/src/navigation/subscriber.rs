//! Indicator subscriber trait

/// Trait for components that mirror the current page (dots, back control)
pub trait IndicatorSync: Send + Sync {
    /// Called after a page change is committed
    fn update(&self, current_page: usize, total_pages: usize);
}
