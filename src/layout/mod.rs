//! Pagination engine: measurement, page fitting and book assembly

pub mod column;
pub mod drop_cap;
pub mod engine;
pub mod font;
mod line_break;
pub mod measure;
pub mod pagination;
pub mod toc;

pub use drop_cap::{split_for_drop_cap, split_for_small_caps, CapSplit, DropCapBox, SmallCapsSplit};
pub use engine::{
    ChapterPaginator, ChapterStartPages, LayoutEngine, PageObserver, Pagination, PlacedPage,
    RenderedBook,
};
pub use font::{FontLibrary, FontMetrics, FontSpec};
pub use line_break::{LineBreaker, LineSpan};
pub use measure::{MetricsMeasure, TextExtent, TextMeasure};
pub use pagination::{
    compose_page, ComposedPage, Fragment, FragmentKind, PageGeometry, PageSlot, PaginationState,
    FOOTER_RESERVE,
};
