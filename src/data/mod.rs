/// Data layer: schema resolution, timestamp parsing, and series loading.
///
/// Architecture:
/// ```text
///  directory of .csv files (unconstrained schemas)
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  column names → semantic roles (keyword match)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ timestamp │  structured parse, permissive fallback
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  sort → resample to cadence → gap-fill
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────┐
///   │ CanonicalSeries  │  one per file, uniform grid, no holes
///   └─────────────────┘
/// ```

pub mod loader;
pub mod model;
pub mod schema;
pub mod timestamp;
