/// Data layer: records, loading, and the filter/aggregation engine.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet / .xlsx        built-in sample
///        │                                      │
///        ▼                                      ▼
///   ┌──────────┐                      ┌────────────────┐
///   │  loader   │  file → Table → rows │ SampleProvider │
///   └──────────┘                      └────────────────┘
///        │                                      │
///        └────────────► DatasetProvider ◄───────┘
///                             │
///                             ▼
///                      ┌──────────────┐
///                      │   Dataset     │  defect rates + top-3, immutable
///                      └──────────────┘
///                             │   + FilterSelection
///                             ▼
///                      ┌──────────────┐
///                      │   filter      │  filtered rows + average rate
///                      └──────────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod provider;
