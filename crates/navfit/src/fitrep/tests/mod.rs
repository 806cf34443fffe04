mod common;
mod record;
