//! Response bodies for resource routes.

use crate::model::Resource;
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct ListBody {
    pub data: Vec<Resource>,
    pub pagination: Pagination,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub total: u64,
    pub limit: u32,
    pub offset: i64,
}
