// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Document collection endpoints
//!
//! - `POST /documents/add`: embed and upsert documents
//! - `DELETE /documents`: remove documents by id
//! - `GET /documents/count`: number of stored documents

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{add_documents_handler, count_documents_handler, delete_documents_handler};
pub use request::{AddDocumentsRequest, DeleteDocumentsRequest, DocumentInput};
pub use response::{CountResponse, MutationResponse};
