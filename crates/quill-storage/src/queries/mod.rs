// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed CRUD operations, one module per entity.

pub mod campaigns;
pub mod flows;
pub mod messages;
pub mod submissions;
pub mod usage;
pub mod users;
