//! The calling convention between compiled rules and an engine.
//!
//! An engine hands each rule a session wrapping the fact under evaluation.
//! The rule's condition reports its outcome through [`Session::gate`]; its
//! consequence mutates the fact and then says how execution continues.

use crate::value::Fact;

/// Per-evaluation context passed to [`Rule::condition`] and
/// [`Rule::consequence`].
///
/// [`Rule::condition`]: crate::rule::Rule::condition
/// [`Rule::consequence`]: crate::rule::Rule::consequence
pub trait Session {
    /// The fact being evaluated.
    fn fact(&self) -> &Fact;

    /// Mutable access for consequences.
    fn fact_mut(&mut self) -> &mut Fact;

    /// Reports whether the current rule's condition holds.
    fn gate(&mut self, open: bool);

    /// Ends execution after the current consequence.
    fn stop(&mut self);

    /// Continues with the rule after the current one.
    fn next(&mut self);

    /// Re-runs the rule set from the first rule.
    fn restart(&mut self);
}
