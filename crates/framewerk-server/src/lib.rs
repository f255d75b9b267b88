// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// framewerk-server — HTTP front end for the Framewerk editor and resize
// services.

pub mod http_server;
pub mod service;

pub use http_server::HttpServer;
pub use service::EditorService;
