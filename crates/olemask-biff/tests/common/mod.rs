#![allow(dead_code)]

pub mod biff_builder;
