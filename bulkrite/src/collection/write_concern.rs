use std::fmt::Display;

/// The acknowledgement level required from the storage engine before a write
/// is considered complete.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum WAcknowledgement {
    /// Fire-and-forget; the storage engine does not confirm persistence.
    Unacknowledged,
    /// The primary confirms the write.
    #[default]
    Acknowledged,
    /// The write is confirmed by the given number of replicas.
    Replicas(u32),
}

/// The write-durability policy applied to each dispatched operation.
///
/// A `WriteConcern` carries the acknowledgement level and whether the write
/// must be journaled before acknowledgement. It never changes ordering or
/// error-aggregation behavior during bulk execution, only whether and when
/// the collection collaborator confirms persistence.
///
/// # Examples
///
/// ```rust,ignore
/// use bulkrite::collection::WriteConcern;
///
/// // Acknowledged by the primary
/// let concern = WriteConcern::acknowledged();
///
/// // Confirmed by four replicas, journaled
/// let concern = WriteConcern::replicas(4).with_journal(true);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WriteConcern {
    acknowledgement: WAcknowledgement,
    journal: bool,
}

impl WriteConcern {
    /// Creates a new `WriteConcern` with the specified acknowledgement level.
    pub fn new(acknowledgement: WAcknowledgement) -> Self {
        Self {
            acknowledgement,
            journal: false,
        }
    }

    /// Creates an acknowledged write concern; the default.
    pub fn acknowledged() -> Self {
        WriteConcern::new(WAcknowledgement::Acknowledged)
    }

    /// Creates an unacknowledged, fire-and-forget write concern.
    pub fn unacknowledged() -> Self {
        WriteConcern::new(WAcknowledgement::Unacknowledged)
    }

    /// Creates a write concern requiring confirmation from `count` replicas.
    pub fn replicas(count: u32) -> Self {
        WriteConcern::new(WAcknowledgement::Replicas(count))
    }

    /// Returns a copy of this write concern with journaling set as given.
    pub fn with_journal(mut self, journal: bool) -> Self {
        self.journal = journal;
        self
    }

    /// Returns the acknowledgement level.
    pub fn acknowledgement(&self) -> &WAcknowledgement {
        &self.acknowledgement
    }

    /// Returns whether the write must be journaled before acknowledgement.
    pub fn is_journaled(&self) -> bool {
        self.journal
    }

    /// Returns whether the collaborator confirms persistence at all.
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledgement != WAcknowledgement::Unacknowledged
    }
}

impl Display for WriteConcern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let w = match &self.acknowledgement {
            WAcknowledgement::Unacknowledged => "0".to_string(),
            WAcknowledgement::Acknowledged => "1".to_string(),
            WAcknowledgement::Replicas(count) => count.to_string(),
        };
        if self.journal {
            write!(f, "{{w: {}, j: true}}", w)
        } else {
            write!(f, "{{w: {}}}", w)
        }
    }
}
