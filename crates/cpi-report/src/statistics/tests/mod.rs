mod common;
mod press;
