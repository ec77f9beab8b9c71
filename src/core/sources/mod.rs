pub mod live_view;
pub mod static_export;

pub use live_view::LiveViewSource;
pub use static_export::StaticModelSource;
