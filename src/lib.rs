//! WS-Trust 1.3 client for SAML 2.0 security token services: bearer and holder-of-key
//! issuance, token exchange, renewal, and validation over SOAP with exclusive-c14n
//! RSA-SHA512 request signatures.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod authn;
pub mod config;
pub mod credentials;
pub mod dsig;
pub mod error;
pub mod handler;
pub mod http;
pub mod ns;
pub mod obs;
pub mod signer;
pub mod soap;
pub mod sts;
pub mod token;
pub mod xml;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{config::EndpointConfig, http::ReqwestTransport, sts::StsClient};

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Constructs an [`StsClient`] for `config` backed by [`test_reqwest_transport`].
	pub fn build_reqwest_test_client(config: EndpointConfig) -> StsClient<ReqwestTransport> {
		StsClient::with_transport(config, test_reqwest_transport())
			.expect("Test endpoint configuration should be valid.")
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use time;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, tokio as _};
