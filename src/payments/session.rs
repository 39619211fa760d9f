//! Payment session state machine.
//!
//! One session drives one mobile-money charge from initiation to a terminal
//! outcome: it classifies the paying operator, submits the initiation, polls
//! the gateway for a terminal status under a hard deadline, and reconciles a
//! successful payment with the staged order. The session runs as a single
//! task; manual status checks and cancellation reach it over channels, so
//! status handling is serialized by construction and at most one status query
//! is ever in flight.

use crate::config::SessionConfig;
use crate::orders::staging::PendingOrderStore;
use crate::orders::submitter::OrderSubmitter;
use crate::payments::error::PaymentError;
use crate::payments::gateway::PaymentGateway;
use crate::payments::operator;
use crate::payments::types::{
    Operator, PaymentReference, PaymentRequest, PaymentStatus, PhoneNumber,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// Why a session ended in `Failed`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailureReason {
    /// Local input problem; the gateway was never reached.
    Validation { message: String },
    /// The phone number matched no operator table; the gateway was never
    /// reached.
    UnknownOperator,
    /// No usable credential, or the gateway refused ours. Retryable after a
    /// refresh.
    Unauthenticated,
    /// The gateway explicitly refused the initiation; message passed through.
    Rejected { message: String },
    /// Transport failure during initiation.
    Transport { message: String },
    /// The gateway reported a terminal non-success status for the charge.
    Declined { status: PaymentStatus },
}

impl FailureReason {
    fn from_payment_error(error: PaymentError) -> Self {
        match error {
            PaymentError::ValidationError { message, .. } => FailureReason::Validation { message },
            PaymentError::Unauthenticated { .. } => FailureReason::Unauthenticated,
            PaymentError::GatewayRejected { message } => FailureReason::Rejected { message },
            PaymentError::NetworkError { message } => FailureReason::Transport { message },
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            FailureReason::Validation { message } => message.clone(),
            FailureReason::UnknownOperator => {
                "This phone number does not match a supported mobile-money operator".to_string()
            }
            FailureReason::Unauthenticated => {
                "Your session has expired. Please sign in and try again".to_string()
            }
            FailureReason::Rejected { message } => message.clone(),
            FailureReason::Transport { .. } => {
                "Payment service is temporarily unavailable. Please retry shortly".to_string()
            }
            FailureReason::Declined { status } => match status {
                PaymentStatus::Cancelled => "The payment was cancelled".to_string(),
                _ => "The payment was not approved".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Initiating,
    AwaitingConfirmation {
        reference: PaymentReference,
        ussd_code: Option<String>,
        poll_attempts: u32,
    },
    Reconciling {
        reference: PaymentReference,
    },
    /// Payment captured. `order_id` is absent when nothing was staged (the
    /// caller falls back to the order id it already knows) or when order
    /// creation is still owed (`pending_submission`).
    Confirmed {
        order_id: Option<String>,
        pending_submission: bool,
    },
    Failed {
        reason: FailureReason,
    },
    /// The deadline elapsed with the charge still pending. Not necessarily a
    /// failure: the customer may still complete it on their handset, so the
    /// caller can offer both "try again" and "check status".
    TimedOut,
    /// The caller tore the session down before a terminal status. The
    /// initiated charge is not rescinded; a new session against the same
    /// reference remains a valid recovery path.
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Confirmed { .. }
                | SessionState::Failed { .. }
                | SessionState::TimedOut
                | SessionState::Cancelled
        )
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

struct ManualCheck;

/// Caller-side handle to a running session.
pub struct SessionHandle {
    cancel_tx: watch::Sender<bool>,
    check_tx: mpsc::Sender<ManualCheck>,
    state_rx: watch::Receiver<SessionState>,
}

impl SessionHandle {
    /// Stops the polling loop and drops its timers. Idempotent.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    /// Requests one immediate out-of-band status check. Returns `false` when
    /// the request was coalesced with one already queued or the session has
    /// finished; it never starts a second polling loop.
    pub fn check_now(&self) -> bool {
        self.check_tx.try_send(ManualCheck).is_ok()
    }

    /// Last state the session published.
    pub fn state(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    /// Watch stream of state changes, for UI layers that render progress.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct PaymentSession {
    gateway: Arc<dyn PaymentGateway>,
    submitter: OrderSubmitter,
    staging: Arc<dyn PendingOrderStore>,
    config: SessionConfig,
    state_tx: watch::Sender<SessionState>,
    cancel_rx: watch::Receiver<bool>,
    check_rx: mpsc::Receiver<ManualCheck>,
    cancel_closed: bool,
    check_closed: bool,
}

impl PaymentSession {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        submitter: OrderSubmitter,
        staging: Arc<dyn PendingOrderStore>,
        config: SessionConfig,
    ) -> (Self, SessionHandle) {
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        // Capacity 1 so rapid manual checks coalesce instead of queueing.
        let (check_tx, check_rx) = mpsc::channel(1);

        let session = PaymentSession {
            gateway,
            submitter,
            staging,
            config,
            state_tx,
            cancel_rx,
            check_rx,
            cancel_closed: false,
            check_closed: false,
        };
        let handle = SessionHandle {
            cancel_tx,
            check_tx,
            state_rx,
        };
        (session, handle)
    }

    /// Drives the session to a terminal state and returns it. The terminal
    /// state is also published on the watch channel before returning.
    pub async fn run(mut self, request: PaymentRequest, user_id: &str) -> SessionState {
        let terminal = self.drive(request, user_id).await;
        self.publish(terminal.clone());
        terminal
    }

    fn publish(&self, state: SessionState) {
        self.state_tx.send_replace(state);
    }

    async fn drive(&mut self, mut request: PaymentRequest, user_id: &str) -> SessionState {
        self.publish(SessionState::Initiating);

        // Operator classification gates the network call: an ambiguous number
        // must never reach the gateway.
        let phone = match PhoneNumber::parse(request.customer.phone.as_str()) {
            Ok(phone) => phone,
            Err(error) => {
                return SessionState::Failed {
                    reason: FailureReason::from_payment_error(error),
                }
            }
        };
        let detected = operator::detect(phone.as_str());
        if detected == Operator::Unknown {
            info!(phone = %phone, "no operator matched; refusing to initiate");
            return SessionState::Failed {
                reason: FailureReason::UnknownOperator,
            };
        }
        request.customer.phone = phone;
        request.operator = detected;

        if let Err(error) = request.validate() {
            return SessionState::Failed {
                reason: FailureReason::from_payment_error(error),
            };
        }

        let initiation = match self.gateway.initiate(&request).await {
            Ok(initiation) => initiation,
            Err(error) => {
                warn!(error = %error, order_id = %request.order_id, "payment initiation failed");
                return SessionState::Failed {
                    reason: FailureReason::from_payment_error(error),
                };
            }
        };

        let reference = initiation.reference.clone();
        let ussd_code = initiation.ussd_code.clone();
        self.publish(SessionState::AwaitingConfirmation {
            reference: reference.clone(),
            ussd_code: ussd_code.clone(),
            poll_attempts: 0,
        });

        self.await_confirmation(reference, ussd_code, user_id).await
    }

    // -----------------------------------------------------------------------
    // Polling loop
    // -----------------------------------------------------------------------

    async fn await_confirmation(
        &mut self,
        reference: PaymentReference,
        ussd_code: Option<String>,
        user_id: &str,
    ) -> SessionState {
        // The deadline is measured from entry into AwaitingConfirmation and
        // never extended; reaching it cancels the loop and any in-flight
        // query with it.
        let deadline = Instant::now() + self.config.confirmation_deadline;
        let mut ticker = time::interval_at(
            Instant::now() + self.config.poll_interval,
            self.config.poll_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut poll_attempts: u32 = 0;

        loop {
            // Wait for a poll trigger or a terminal condition.
            tokio::select! {
                biased;
                changed = self.cancel_rx.changed(), if !self.cancel_closed => {
                    match changed {
                        Ok(()) if *self.cancel_rx.borrow() => {
                            info!(reference = %reference, "session cancelled while awaiting confirmation");
                            return SessionState::Cancelled;
                        }
                        Ok(()) => continue,
                        Err(_) => {
                            // Handle dropped; cancellation is no longer possible.
                            self.cancel_closed = true;
                            continue;
                        }
                    }
                }
                _ = time::sleep_until(deadline) => {
                    warn!(
                        reference = %reference,
                        poll_attempts,
                        "confirmation deadline elapsed with charge still pending"
                    );
                    return SessionState::TimedOut;
                }
                maybe_check = self.check_rx.recv(), if !self.check_closed => {
                    match maybe_check {
                        Some(ManualCheck) => {
                            debug!(reference = %reference, "manual status check requested");
                        }
                        None => {
                            self.check_closed = true;
                            continue;
                        }
                    }
                }
                _ = ticker.tick() => {}
            }

            // One status query, racing the deadline and cancellation so a
            // response arriving after either is dropped unobserved.
            poll_attempts += 1;
            let polled = tokio::select! {
                biased;
                changed = self.cancel_rx.changed(), if !self.cancel_closed => {
                    match changed {
                        Ok(()) if *self.cancel_rx.borrow() => {
                            info!(reference = %reference, "session cancelled mid-query");
                            return SessionState::Cancelled;
                        }
                        Ok(()) => continue,
                        Err(_) => {
                            self.cancel_closed = true;
                            continue;
                        }
                    }
                }
                _ = time::sleep_until(deadline) => {
                    warn!(
                        reference = %reference,
                        poll_attempts,
                        "confirmation deadline elapsed; discarding in-flight status query"
                    );
                    return SessionState::TimedOut;
                }
                result = self.gateway.query_status(&reference) => result,
            };

            match polled {
                Ok(PaymentStatus::Pending) => {
                    debug!(reference = %reference, poll_attempts, "charge still pending");
                    self.publish(SessionState::AwaitingConfirmation {
                        reference: reference.clone(),
                        ussd_code: ussd_code.clone(),
                        poll_attempts,
                    });
                }
                Ok(PaymentStatus::Successful) => {
                    info!(reference = %reference, poll_attempts, "charge confirmed by gateway");
                    return self.reconcile(reference, user_id).await;
                }
                Ok(status @ (PaymentStatus::Failed | PaymentStatus::Cancelled)) => {
                    info!(reference = %reference, status = %status, "charge ended without capture");
                    return SessionState::Failed {
                        reason: FailureReason::Declined { status },
                    };
                }
                Err(error) => {
                    // A single missed poll is not fatal; the deadline is the
                    // backstop.
                    warn!(
                        reference = %reference,
                        poll_attempts,
                        error = %error,
                        "status poll failed; continuing"
                    );
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Reconciliation
    // -----------------------------------------------------------------------

    /// Converts the confirmed payment into a persisted order. Entered exactly
    /// once per session; the serialized loop guarantees only the first
    /// terminal observation reaches this point.
    async fn reconcile(&mut self, reference: PaymentReference, user_id: &str) -> SessionState {
        self.publish(SessionState::Reconciling {
            reference: reference.clone(),
        });

        let staged = match self.staging.load().await {
            Ok(staged) => staged,
            Err(error) => {
                // The staged record is left untouched so the obligation can
                // still be reconciled later.
                warn!(
                    reference = %reference,
                    error = %error,
                    "could not read staged order during reconciliation"
                );
                None
            }
        };

        let Some(pending) = staged else {
            info!(
                reference = %reference,
                "payment confirmed with no staged order; caller resolves the order directly"
            );
            return SessionState::Confirmed {
                order_id: None,
                pending_submission: false,
            };
        };

        match self.submitter.submit(&pending, &reference, user_id).await {
            Ok(created) => {
                if let Err(error) = self.staging.clear().await {
                    warn!(
                        reference = %reference,
                        order_id = %created.order_id,
                        error = %error,
                        "order created but staged copy could not be cleared"
                    );
                }
                info!(
                    reference = %reference,
                    order_id = %created.order_id,
                    "payment reconciled into order"
                );
                SessionState::Confirmed {
                    order_id: Some(created.order_id),
                    pending_submission: false,
                }
            }
            Err(error) => {
                // Payment is captured; the order is owed, not lost. The
                // staged record and reference stay put for a later retry.
                warn!(
                    reference = %reference,
                    error = %error,
                    "order submission failed after capture; staged order retained"
                );
                SessionState::Confirmed {
                    order_id: None,
                    pending_submission: true,
                }
            }
        }
    }
}
