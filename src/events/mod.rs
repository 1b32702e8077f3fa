use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Creates a sender together with the receiving half of a bounded channel
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends and logs a failure instead of returning it; the write that
    /// produced the event has already been committed.
    pub async fn publish(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "Dropping domain event");
        }
    }
}

/// Things that happened to salesmen, parties and quotation forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    SalesmanCreated(i64),
    PartyCreated { party_id: i64, salesman_id: i64 },
    QuotationCreated { form_id: i64, quotation_number: String },
    QuotationUpdated(i64),
    QuotationDeleted(i64),
}

/// Drains the channel until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::QuotationCreated {
                form_id,
                quotation_number,
            } => info!(form_id, %quotation_number, "Quotation issued"),
            Event::QuotationDeleted(form_id) => info!(form_id, "Quotation deleted"),
            other => debug!(event = ?other, "Received event"),
        }
    }

    info!("Event processing loop finished");
}
