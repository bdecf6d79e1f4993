#![allow(dead_code)]

pub mod camera_server;
