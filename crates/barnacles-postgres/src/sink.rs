use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use barnacles_domain::error::DomainError;
use barnacles_domain::event::{Event, EventKind};
use barnacles_domain::notifications::NotificationHub;
use barnacles_domain::store::{EventStore, StoredEventProducer};
use barnacles_domain::{DomainResult, DynambService, RaddecService, SpatemService};

use crate::client::PostgresClient;
use crate::config::{EventsToStore, SinkConfig};
use crate::event_store::PostgresEventStore;

/// Event-sink adapter: routes inbound events through the per-kind
/// filter → transform → insert pipeline and republishes stored-event
/// confirmations on the notification hub.
///
/// `handle_event` never blocks on the database and never raises an
/// error back to the caller; each accepted event becomes one
/// independent task against the shared pool, with no ordering across
/// events.
pub struct PostgresSink {
    services: Services,
    notifications: Arc<NotificationHub>,
    print_errors: bool,
}

/// Per-kind pipeline services for the configured kinds only.
#[derive(Clone)]
struct Services {
    raddec: Option<Arc<RaddecService>>,
    dynamb: Option<Arc<DynambService>>,
    spatem: Option<Arc<SpatemService>>,
}

impl Services {
    async fn dispatch(&self, event: Event) -> DomainResult<()> {
        match event {
            Event::Raddec(raddec) => match &self.raddec {
                Some(service) => service.store_raddec(raddec).await,
                None => Ok(()),
            },
            Event::Dynamb(dynamb) => match &self.dynamb {
                Some(service) => service.store_dynamb(dynamb).await,
                None => Ok(()),
            },
            Event::Spatem(spatem) => match &self.spatem {
                Some(service) => service.store_spatem(spatem).await,
                None => Ok(()),
            },
        }
    }

    fn is_configured(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Raddec => self.raddec.is_some(),
            EventKind::Dynamb => self.dynamb.is_some(),
            EventKind::Spatem => self.spatem.is_some(),
        }
    }
}

impl PostgresSink {
    /// Builds a sink with its own connection pool and spawns a
    /// non-blocking connectivity probe. A failed probe is logged,
    /// never fatal. Must be called within a tokio runtime.
    pub fn new(config: SinkConfig, events_to_store: EventsToStore) -> anyhow::Result<Self> {
        let client = PostgresClient::new(&config)?;

        let probe = client.clone();
        let print_errors = config.print_errors;
        tokio::spawn(async move {
            match probe.ping().await {
                Ok(()) => info!("connected to database"),
                Err(e) => {
                    if print_errors {
                        error!(error = %e, "could not connect to database");
                    }
                }
            }
        });

        Ok(Self::with_client(client, events_to_store, print_errors))
    }

    /// Builds a sink over an already-constructed pooled client.
    pub fn with_client(
        client: PostgresClient,
        events_to_store: EventsToStore,
        print_errors: bool,
    ) -> Self {
        Self::from_parts(
            Arc::new(PostgresEventStore::new(client)),
            events_to_store,
            print_errors,
        )
    }

    /// Builds a sink over any event store implementation.
    pub fn from_parts(
        store: Arc<dyn EventStore>,
        events_to_store: EventsToStore,
        print_errors: bool,
    ) -> Self {
        let notifications = Arc::new(NotificationHub::new());
        let producer = Arc::clone(&notifications) as Arc<dyn StoredEventProducer>;

        let raddec = events_to_store.raddec.map(|options| {
            Arc::new(RaddecService::new(
                Arc::new(options.filter.build()),
                options.include_packets,
                Arc::clone(&store),
                Arc::clone(&producer),
            ))
        });
        let dynamb = events_to_store.dynamb.map(|options| {
            Arc::new(DynambService::new(
                Arc::new(options.filter.build_dynamb()),
                Arc::clone(&store),
                Arc::clone(&producer),
            ))
        });
        let spatem = events_to_store.spatem.map(|options| {
            Arc::new(SpatemService::new(
                Arc::new(options.filter.build_spatem()),
                Arc::clone(&store),
                Arc::clone(&producer),
            ))
        });

        Self {
            services: Services {
                raddec,
                dynamb,
                spatem,
            },
            notifications,
            print_errors,
        }
    }

    /// Notification channel carrying stored-event confirmations,
    /// published only after the corresponding insert succeeded.
    pub fn notifications(&self) -> Arc<NotificationHub> {
        Arc::clone(&self.notifications)
    }

    /// Handles one inbound event. Unrecognized names and kinds absent
    /// from the active configuration set are ignored. Storage happens
    /// on an independent task; this call returns before any failure
    /// can surface.
    pub fn handle_event(&self, name: &str, payload: Value) {
        let Some(kind) = EventKind::from_name(name) else {
            return;
        };
        if !self.services.is_configured(kind) {
            return;
        }

        let services = self.services.clone();
        let print_errors = self.print_errors;
        tokio::spawn(async move {
            let result = match Event::from_payload(kind, payload) {
                Ok(event) => services.dispatch(event).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                report_error(print_errors, kind, &e);
            }
        });
    }
}

/// Single error path for per-event failures. Diagnostics are opt-in;
/// the failed event is discarded either way.
fn report_error(print_errors: bool, kind: EventKind, error: &DomainError) {
    if print_errors {
        error!(kind = %kind, error = %error, "failed to store event");
    }
}
