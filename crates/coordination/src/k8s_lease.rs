// SPDX-License-Identifier: MIT

//! HA candidacy backed by a `coordination.k8s.io/v1` `Lease`.
//!
//! Grounded on kube-rs's own `LeaderElector` (client-go's leaderelection
//! port): candidates race to create/patch a shared `Lease`, the current
//! holder renews it before it expires, and a lease left unrenewed past its
//! duration is free for any candidate to acquire. This is a deliberately
//! simplified, hand-rolled version of that algorithm, built directly on
//! `kube::Api<Lease>` rather than pulling in a leader-election helper
//! crate, since the spec's `Candidate` contract only needs
//! acquire/renew/release, not the full watch-driven state machine.

use crate::candidate::{Candidate, CoordinationError, LeadershipListener};
use crate::hook::{AbdicationHook, HookAction};
use async_trait::async_trait;
use chrono::Utc;
use k8s_openapi::api::coordination::v1::{Lease, LeaseSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::MicroTime;
use kube::api::{Api, Patch, PatchParams};
use kube::Client;
use std::sync::Arc;
use std::time::Duration;

/// HA candidate that competes for a Kubernetes `Lease`.
pub struct K8sLeaseCandidate {
    api: Api<Lease>,
    lease_name: String,
    identity: String,
    lease_duration: Duration,
    retry_period: Duration,
    renew_period: Duration,
}

impl K8sLeaseCandidate {
    pub fn new(client: Client, namespace: &str, lease_name: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
            lease_name: lease_name.into(),
            identity: identity.into(),
            lease_duration: Duration::from_secs(15),
            retry_period: Duration::from_secs(2),
            renew_period: Duration::from_secs(5),
        }
    }

    pub fn with_timings(mut self, lease_duration: Duration, retry_period: Duration, renew_period: Duration) -> Self {
        self.lease_duration = lease_duration;
        self.retry_period = retry_period;
        self.renew_period = renew_period;
        self
    }

    /// Attempt to become (or remain) the lease holder. Returns `Ok(true)`
    /// if this replica holds the lease after the call.
    async fn try_acquire_or_renew(&self) -> Result<bool, CoordinationError> {
        let existing = self
            .api
            .get_opt(&self.lease_name)
            .await
            .map_err(|e| CoordinationError::OfferFailed(e.to_string()))?;

        let now = Utc::now();
        let held_by_other = existing.as_ref().is_some_and(|lease| {
            let spec = lease.spec.as_ref();
            let holder = spec.and_then(|s| s.holder_identity.as_deref()).unwrap_or("");
            if holder.is_empty() || holder == self.identity {
                return false;
            }
            let renewed_at = spec.and_then(|s| s.renew_time.as_ref()).map(|t| t.0);
            match renewed_at {
                Some(renewed_at) => now.signed_duration_since(renewed_at).to_std().unwrap_or_default()
                    < self.lease_duration,
                None => true,
            }
        });

        if held_by_other {
            return Ok(false);
        }

        let was_mine =
            existing.as_ref().and_then(|l| l.spec.as_ref()).and_then(|s| s.holder_identity.as_deref())
                == Some(self.identity.as_str());

        let mut lease = existing.unwrap_or_default();
        lease.metadata.name.get_or_insert_with(|| self.lease_name.clone());
        lease.metadata.managed_fields = None;
        let spec = lease.spec.get_or_insert_with(LeaseSpec::default);
        spec.holder_identity = Some(self.identity.clone());
        spec.renew_time = Some(MicroTime(now));
        spec.lease_duration_seconds = Some(self.lease_duration.as_secs() as i32);
        if !was_mine {
            spec.acquire_time = Some(MicroTime(now));
            spec.lease_transitions = Some(spec.lease_transitions.unwrap_or(0) + 1);
        }

        let params = PatchParams::apply("ms-scheduler").force();
        self.api
            .patch(&self.lease_name, &params, &Patch::Apply(&lease))
            .await
            .map_err(|e| CoordinationError::OfferFailed(e.to_string()))?;

        Ok(true)
    }

    async fn release(&self) {
        let patch = serde_json::json!({
            "apiVersion": "coordination.k8s.io/v1",
            "kind": "Lease",
            "spec": { "holderIdentity": serde_json::Value::Null },
        });
        let params = PatchParams::apply("ms-scheduler").force();
        if let Err(e) = self.api.patch(&self.lease_name, &params, &Patch::Apply(&patch)).await {
            tracing::warn!(error = %e, lease = %self.lease_name, "failed to release lease");
        }
    }
}

struct ReleaseLeaseHook(Arc<K8sLeaseCandidate>);

#[async_trait]
impl HookAction for ReleaseLeaseHook {
    async fn run(&self) {
        self.0.release().await;
    }
}

#[async_trait]
impl Candidate for K8sLeaseCandidate {
    async fn offer_leadership(
        self: Arc<Self>,
        listener: Arc<dyn LeadershipListener>,
    ) -> Result<(), CoordinationError> {
        // Confirm the API is reachable before reporting this offer as
        // registered; everything past this point happens on the background
        // election task.
        let _ = self
            .api
            .get_opt(&self.lease_name)
            .await
            .map_err(|e| CoordinationError::OfferFailed(e.to_string()))?;

        let this = Arc::clone(&self);
        tokio::spawn(async move {
            loop {
                match this.try_acquire_or_renew().await {
                    Ok(true) => {
                        tracing::info!(identity = %this.identity, "acquired lease, electing");
                        let hook = AbdicationHook::new(Arc::new(ReleaseLeaseHook(Arc::clone(&this))));
                        listener.on_elected(hook).await;

                        loop {
                            tokio::time::sleep(this.renew_period).await;
                            match this.try_acquire_or_renew().await {
                                Ok(true) => continue,
                                Ok(false) => {
                                    tracing::info!(identity = %this.identity, "lost lease, defeated");
                                    listener.on_defeated().await;
                                    break;
                                }
                                Err(e) => {
                                    tracing::warn!(error = %e, "lease renew failed, treating as defeated");
                                    listener.on_defeated().await;
                                    break;
                                }
                            }
                        }
                        break;
                    }
                    Ok(false) => {
                        tokio::time::sleep(this.retry_period).await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "lease acquisition attempt failed");
                        tokio::time::sleep(this.retry_period).await;
                    }
                }
            }
        });

        Ok(())
    }
}
