// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Secure File Exchange - Encrypted Upload/Download Service
//!
//! Clients upload files which are sealed with AES-256-GCM and stored on
//! disk; other clients list and download them, receiving decrypted bytes.
//! Every download is appended to an access log.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `config` - Environment configuration
//! - `storage` - Key management, encrypted file store, access log

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
