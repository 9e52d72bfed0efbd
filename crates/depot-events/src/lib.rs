mod event;
mod sink;

use std::sync::Arc;

pub use event::*;
pub use sink::*;

/// Shared handle to an event sink.
pub type EventSinkHandle = Arc<dyn EventSink>;

/// Handle to a sink that drops every event.
pub fn null_sink() -> EventSinkHandle {
    Arc::new(NullSink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink() {
        let sink = null_sink();
        sink.emit(RepositoryEvent::Created {
            id: "internal".to_string(),
            kind: RepositoryKind::Managed,
        });
    }

    #[test]
    fn test_channel_sink() {
        let (sink, rx) = ChannelSink::new();
        sink.emit(RepositoryEvent::Created {
            id: "internal".to_string(),
            kind: RepositoryKind::Managed,
        });
        sink.emit(RepositoryEvent::StagingCreated {
            base_id: "internal".to_string(),
            staging_id: "internal-stage".to_string(),
        });

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].repository_id(), "internal-stage");
    }

    #[test]
    fn test_channel_sink_receiver_dropped() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.emit(RepositoryEvent::Removed {
            id: "orphaned".to_string(),
            kind: RepositoryKind::Group,
        });
    }

    #[test]
    fn test_collector_sink() {
        let collector = Arc::new(CollectorSink::default());
        assert!(collector.is_empty());

        let sink: EventSinkHandle = collector.clone();
        sink.emit(RepositoryEvent::Registered {
            id: "central".to_string(),
            kind: RepositoryKind::Remote,
        });
        sink.emit(RepositoryEvent::RemoteIndexDisabled {
            id: "central".to_string(),
            index_url: "not a url".to_string(),
        });

        assert_eq!(collector.len(), 2);
        assert!(matches!(
            &collector.events()[1],
            RepositoryEvent::RemoteIndexDisabled { id, .. } if id == "central"
        ));
    }

    #[test]
    fn test_event_sink_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NullSink>();
        assert_send_sync::<ChannelSink>();
        assert_send_sync::<CollectorSink>();
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(RepositoryKind::Managed.to_string(), "managed");
        assert_eq!(RepositoryKind::Group.to_string(), "group");
    }
}
