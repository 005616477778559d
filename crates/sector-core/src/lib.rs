pub mod classifier;
pub mod cycle;
pub mod groups;
pub mod models;
pub mod projection;
pub mod rules;
pub mod sectors;
pub mod session;
pub mod spatial;
pub mod summary;

pub use classifier::{Classification, Classifier};
pub use cycle::{CycleContext, CycleReport, FlightRow};
pub use groups::{CustomGroup, GroupConfig, GroupConfigError};
pub use models::{AircraftRecord, Assignment, Controller, FlightPlanInfo, TrafficFeed};
pub use projection::{project, Horizon, ProjectedFlight, ProjectedPoint};
pub use rules::{BandThresholds, ClassifierRules};
pub use sectors::{Sector, SectorFeedError, SectorIndex};
pub use session::{LogColumn, LogRow, MonitorSession, SummaryLog};
pub use spatial::{haversine_distance_nm, Polygon};
pub use summary::{summarize_groups, summarize_specialties, Band, HorizonBands, HorizonCounts, SummaryRow};
