pub mod conops;
pub mod mission;
pub mod sim;
pub mod vehicle;

#[cfg(test)]
mod test;
