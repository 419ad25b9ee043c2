#![allow(dead_code)]

pub mod doc_builder;
