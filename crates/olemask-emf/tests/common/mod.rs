#![allow(dead_code)]

pub mod emf_builder;
