use crate::SimulationError;
use idf_chain_registry::chain_display_name;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;

/// `0x` followed by 64 random hex digits.
pub fn random_hash<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub time: String,
    pub read: bool,
    pub network: String,
    pub message_hash: String,
}

/// A message handed to the (simulated) cross-chain relay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossChainMessage {
    pub from_chain: u64,
    pub to_chain: u64,
    pub payload: Value,
}

/// Relays `message` and returns its hash. Nothing leaves the process.
pub fn dispatch<R: Rng + ?Sized>(message: &CrossChainMessage, rng: &mut R) -> String {
    let hash = random_hash(rng);
    tracing::info!(
        from_chain = message.from_chain,
        to_chain = message.to_chain,
        hash = %hash,
        "cross-chain message dispatched"
    );
    hash
}

#[derive(Debug, Clone, Default)]
pub struct Inbox {
    messages: Vec<Message>,
}

impl Inbox {
    /// The five demo messages. `display_label` is the session's name or
    /// truncated address and appears in the first one.
    pub fn seeded<R: Rng + ?Sized>(display_label: &str, rng: &mut R) -> Self {
        let seed: [(&str, String, &str, bool, &str); 5] = [
            (
                "Verified swap completed",
                format!(
                    "Your verified Identifi swap from ETH to USDC has been completed for \
                     {display_label}"
                ),
                "Just now",
                false,
                "Ethereum",
            ),
            (
                "Cross-chain transfer complete",
                "Your transfer from Polygon to Rootstock has been completed".to_owned(),
                "2 minutes ago",
                false,
                "Polygon → Rootstock",
            ),
            (
                "New token available",
                "You can now swap for RIF token on Rootstock".to_owned(),
                "1 hour ago",
                true,
                "Rootstock",
            ),
            (
                "Verification reminder",
                "Complete your Identifi verification to unlock all features".to_owned(),
                "5 hours ago",
                true,
                "Ethereum",
            ),
            (
                "Cross-chain message received",
                "You've received a new message from a dApp on Rootstock".to_owned(),
                "1 day ago",
                true,
                "Rootstock → Ethereum",
            ),
        ];

        let messages = seed
            .into_iter()
            .zip(1..)
            .map(|((title, description, time, read, network), id)| Message {
                id,
                title: title.to_owned(),
                description,
                time: time.to_owned(),
                read,
                network: network.to_owned(),
                message_hash: random_hash(rng),
            })
            .collect();
        Self { messages }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn unread_count(&self) -> usize {
        self.messages.iter().filter(|m| !m.read).count()
    }

    /// Returns false when no message has that id.
    pub fn mark_as_read(&mut self, id: u32) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.read = true;
                true
            }
            None => false,
        }
    }

    /// Sends `body` between two chains and files a read copy at the top of
    /// the inbox. Returns the message hash.
    pub fn send_message<R: Rng + ?Sized>(
        &mut self,
        from_chain: u64,
        to_chain: u64,
        body: &str,
        rng: &mut R,
    ) -> Result<String, SimulationError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(SimulationError::EmptyMessage);
        }

        let message = CrossChainMessage {
            from_chain,
            to_chain,
            payload: Value::String(body.to_owned()),
        };
        let hash = dispatch(&message, rng);

        let id = self.messages.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        self.messages.insert(
            0,
            Message {
                id,
                title: "Message sent".to_owned(),
                description: body.to_owned(),
                time: "Just now".to_owned(),
                read: true,
                network: format!(
                    "{} → {}",
                    chain_display_name(Some(from_chain)),
                    chain_display_name(Some(to_chain))
                ),
                message_hash: hash.clone(),
            },
        );
        Ok(hash)
    }
}
