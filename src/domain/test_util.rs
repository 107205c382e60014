use anyhow::anyhow;

/// Whether a faked driven port should behave as if its backing service were reachable
pub enum Connectivity {
    Connected,
    Disconnected,
}

impl Connectivity {
    /// Fails with a communication error when the port is configured as disconnected
    pub fn blow_up_if_disconnected(&self) -> Result<(), anyhow::Error> {
        match self {
            Self::Connected => Ok(()),
            Self::Disconnected => Err(anyhow!("could not reach the document store!")),
        }
    }
}

/// Records the arguments of every call to a faked function and hands back a canned result.
/// Popular mocking crates struggle with `async fn` in traits, so port fakes wrap a set of these
/// in a [Mutex][std::sync::Mutex] and implement the port trait on the lock.
///
/// * `Args` is what gets captured per call (usually a tuple of owned argument values)
/// * `Ret` is the return type of the faked function
pub struct FakeImplementation<Args, Ret> {
    saved_arguments: Vec<Args>,
    return_value: Option<Ret>,
}

impl<Args, Ret> FakeImplementation<Args, Ret> {
    pub fn new() -> FakeImplementation<Args, Ret> {
        FakeImplementation {
            saved_arguments: Vec::new(),
            return_value: None,
        }
    }

    pub fn save_arguments(&mut self, arguments: Args) {
        self.saved_arguments.push(arguments)
    }

    /// Every set of arguments this fake was invoked with, oldest first
    pub fn calls(&self) -> &[Args] {
        self.saved_arguments.as_slice()
    }
}

impl<Args, Ret> FakeImplementation<Args, Ret>
where
    Ret: Clone,
{
    pub fn set_return_value(&mut self, return_value: Ret) {
        self.return_value = Some(return_value)
    }

    /// Produces the configured return value. Panics (failing the test) if none was configured.
    pub fn return_value(&self) -> Ret {
        match self.return_value {
            None => panic!("Tried to return from a faked function without configuring a return value!"),
            Some(ref ret_val) => ret_val.clone(),
        }
    }
}
