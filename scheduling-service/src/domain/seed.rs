/// Supplies the base seed when a request does not pin one.
///
/// The engine itself never draws entropy; everything stochastic derives from
/// the seed handed to it.
#[cfg_attr(feature = "test-support", mockall::automock)]
pub trait SeedSource: Send + Sync {
    fn next_seed(&self) -> u64;
}
