/// Data layer: table model, loading, filtering, column lookup, sample ids.
///
/// Architecture:
/// ```text
///   data/*.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse CSV, normalize headers → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  blank excluded samples in place, row subsets
///   └──────────┘
///        │
///        ▼
///   ┌─────────┐   ┌─────────┐
///   │ columns │   │ samples │  regex column lookup, id sort keys
///   └─────────┘   └─────────┘
/// ```

pub mod columns;
pub mod filter;
pub mod loader;
pub mod model;
pub mod samples;
