#![allow(dead_code)]

pub mod hwp_builder;
