pub mod get;
pub mod put;

#[cfg(test)]
mod test_support;
