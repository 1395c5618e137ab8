use crate::resolver::engine::ResolveError;

/// Where the resolver's output goes.
/// Production uses [`ConsoleInterface`]; tests substitute in-memory doubles.
pub(crate) trait UserInterface {
    fn print(&self, message: String);
    fn print_error(&self, error: ResolveError);
}

#[derive(Default)]
pub(crate) struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, error: ResolveError) {
        eprintln!("{error}");
    }
}
