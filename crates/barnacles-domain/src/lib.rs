pub mod dynamb_service;
pub mod error;
pub mod event;
pub mod filter;
pub mod notifications;
pub mod raddec_service;
pub mod spatem_service;
pub mod store;

pub use dynamb_service::DynambService;
pub use error::{DomainError, DomainResult};
pub use event::{Dynamb, Event, EventKind, Feature, FeatureCollection, Geometry, Raddec, Spatem};
pub use filter::{
    DeviceFilterParameters, DynambFilter, ParameterDynambFilter, ParameterRaddecFilter,
    ParameterSpatemFilter, RaddecFilter, RaddecFilterParameters, SpatemFilter,
};
pub use notifications::NotificationHub;
pub use raddec_service::RaddecService;
pub use spatem_service::SpatemService;
pub use store::{EventStore, NewEventRow, NewSpatemRow, StoredEvent, StoredEventProducer};

#[cfg(any(test, feature = "testing"))]
pub use filter::{MockDynambFilter, MockRaddecFilter, MockSpatemFilter};
#[cfg(any(test, feature = "testing"))]
pub use store::{MockEventStore, MockStoredEventProducer};
