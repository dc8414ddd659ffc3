mod builder;

pub use builder::KolorsApiBuilder;
