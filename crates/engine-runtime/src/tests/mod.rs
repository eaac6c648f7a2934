pub(crate) mod mock;

mod pipeline;
