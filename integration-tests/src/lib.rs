//! Integration tests package lib
#![allow(dead_code)]

mod utils;

#[cfg(test)]
mod transfer_flow_test;
