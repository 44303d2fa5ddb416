use crate::assignment::closest_technician;
use crate::models::{RepairRequest, RepairStatus, Technician};
use chrono::{DateTime, SubsecRound, Utc};
use reshop_shared::text::check_field;
use reshop_shared::{FieldError, RepairId};
use std::collections::VecDeque;
use tracing::{info, warn};

/// Old and new status after a successful update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub id: RepairId,
    pub from: RepairStatus,
    pub to: RepairStatus,
}

/// Outcome of handing the next queued request to a technician
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub id: RepairId,
    pub technician: String,
    pub previous_status: RepairStatus,
}

/// Tracks repair requests and their status lifecycle.
///
/// Requests are never removed. A separate FIFO queue holds requests waiting
/// for a technician.
#[derive(Debug, Clone)]
pub struct RepairTracker {
    requests: Vec<RepairRequest>,
    queue: VecDeque<RepairId>,
    allow_backward_transitions: bool,
}

impl RepairTracker {
    pub fn new() -> Self {
        Self {
            requests: Vec::new(),
            queue: VecDeque::new(),
            allow_backward_transitions: true,
        }
    }

    /// When disabled, status updates may not move a request to an earlier
    /// stage (e.g. Completed back to Pending).
    pub fn set_allow_backward_transitions(&mut self, allow: bool) {
        self.allow_backward_transitions = allow;
    }

    pub fn allows_backward_transitions(&self) -> bool {
        self.allow_backward_transitions
    }

    /// Register a new request with status Pending.
    ///
    /// The submission time is kept to whole seconds, as in the data file.
    pub fn submit(
        &mut self,
        item_name: impl Into<String>,
        issue: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<RepairId, RepairError> {
        let item_name = item_name.into();
        let issue = issue.into();
        check_field("item name", &item_name)?;
        check_field("issue", &issue)?;

        let id = self.next_id()?;
        info!("Repair request {} submitted for '{}': {}", id, item_name, issue);

        self.requests
            .push(RepairRequest::new(id, item_name, issue, now.trunc_subsecs(0)));
        Ok(id)
    }

    /// Re-insert a previously persisted request; its id is reassigned from position.
    pub fn restore(&mut self, mut request: RepairRequest) -> Result<RepairId, RepairError> {
        check_field("item name", &request.item_name)?;
        check_field("issue", &request.issue)?;
        if let Some(technician) = &request.assigned_technician {
            check_field("technician", technician)?;
        }

        request.id = self.next_id()?;
        let id = request.id;
        self.requests.push(request);
        Ok(id)
    }

    pub fn get(&self, id: RepairId) -> Option<&RepairRequest> {
        self.requests.get(id.index())
    }

    pub fn requests(&self) -> &[RepairRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Apply an admin status update given as free text.
    ///
    /// Accepts "pending", "in progress" or "completed" in any case and stores
    /// the canonical status.
    pub fn update_status(&mut self, id: RepairId, raw_status: &str) -> Result<StatusChange, RepairError> {
        let allow_backward = self.allow_backward_transitions;
        let request = self.get_mut(id)?;

        let to = RepairStatus::parse_update(raw_status)
            .ok_or_else(|| RepairError::InvalidStatus(raw_status.to_string()))?;
        let from = request.status;

        if !allow_backward && to.stage() < from.stage() {
            return Err(RepairError::InvalidTransition { id, from, to });
        }

        request.status = to;
        info!("Repair request {} status: {} -> {}", id, from, to);

        Ok(StatusChange { id, from, to })
    }

    /// Queue a request for technician assignment with its complexity (1-5)
    pub fn enqueue_for_assignment(&mut self, id: RepairId, complexity: u8) -> Result<(), RepairError> {
        if !(1..=5).contains(&complexity) {
            return Err(RepairError::InvalidComplexity(complexity));
        }
        if self.queue.contains(&id) {
            return Err(RepairError::AlreadyQueued(id));
        }

        let allow_backward = self.allow_backward_transitions;
        let request = self.get_mut(id)?;

        // Assignment moves the request to a mid-lifecycle stage
        if !allow_backward && request.status == RepairStatus::Completed {
            return Err(RepairError::InvalidTransition {
                id,
                from: request.status,
                to: RepairStatus::Assigned,
            });
        }

        request.complexity = Some(complexity);
        self.queue.push_back(id);
        info!("Repair request {} queued for assignment (complexity {})", id, complexity);

        Ok(())
    }

    /// Requests waiting for a technician, head first
    pub fn queued(&self) -> impl Iterator<Item = &RepairRequest> + '_ {
        self.queue.iter().filter_map(move |id| self.get(*id))
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Assign the request at the head of the queue to the closest-matching technician.
    ///
    /// With an empty pool the request stays at the head of the queue. When
    /// backward transitions are disabled, a request completed while it was
    /// waiting is dropped from the queue and reported as an invalid transition.
    pub fn assign_next(&mut self, pool: &[Technician]) -> Result<Assignment, RepairError> {
        let id = self.queue.pop_front().ok_or(RepairError::QueueEmpty)?;

        let (complexity, status) = match self.get(id) {
            Some(request) => (request.complexity.unwrap_or(1), request.status),
            None => return Err(RepairError::NotFound(id)),
        };

        if !self.allow_backward_transitions && RepairStatus::Assigned.stage() < status.stage() {
            warn!("Repair request {} is already {}, dropping it from the queue", id, status);
            return Err(RepairError::InvalidTransition {
                id,
                from: status,
                to: RepairStatus::Assigned,
            });
        }

        let technician = match closest_technician(pool, complexity) {
            Some(tech) => tech.name.clone(),
            None => {
                warn!("No technician available for repair request {}, keeping it queued", id);
                self.queue.push_front(id);
                return Err(RepairError::NoTechnicianAvailable(id));
            }
        };

        let request = self.get_mut(id)?;
        let previous_status = request.status;
        request.assigned_technician = Some(technician.clone());
        request.status = RepairStatus::Assigned;

        info!("Repair request {} assigned to {}", id, technician);

        Ok(Assignment {
            id,
            technician,
            previous_status,
        })
    }

    /// Requests assigned to the given technician
    pub fn assigned_to<'a>(&'a self, technician: &'a str) -> impl Iterator<Item = &'a RepairRequest> + 'a {
        self.requests
            .iter()
            .filter(move |r| r.assigned_technician.as_deref() == Some(technician))
    }

    fn next_id(&self) -> Result<RepairId, RepairError> {
        RepairId::from_index(self.requests.len()).ok_or(RepairError::TrackerFull)
    }

    fn get_mut(&mut self, id: RepairId) -> Result<&mut RepairRequest, RepairError> {
        self.requests
            .get_mut(id.index())
            .ok_or(RepairError::NotFound(id))
    }
}

impl Default for RepairTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepairError {
    #[error("Repair request not found: {0}")]
    NotFound(RepairId),

    #[error("Invalid status {0:?}: expected Pending, In Progress or Completed")]
    InvalidStatus(String),

    #[error("Invalid state transition for {id} from {from} to {to}")]
    InvalidTransition {
        id: RepairId,
        from: RepairStatus,
        to: RepairStatus,
    },

    #[error("Repair complexity must be between 1 and 5, got {0}")]
    InvalidComplexity(u8),

    #[error("Repair request already queued: {0}")]
    AlreadyQueued(RepairId),

    #[error("Repair queue is empty")]
    QueueEmpty,

    #[error("No technician available for {0}")]
    NoTechnicianAvailable(RepairId),

    #[error("Repair tracker cannot hold more requests")]
    TrackerFull,

    #[error(transparent)]
    InvalidField(#[from] FieldError),
}
