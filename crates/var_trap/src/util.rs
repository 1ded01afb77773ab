//! Small helpers shared by the registry and facade.

/// Returns the elements of `a` not present in `b`, in `a`'s order.
pub fn difference<'a, T, U>(a: &'a [T], b: &[U]) -> Vec<&'a T>
where
	T: PartialEq<U>,
{
	a.iter().filter(|x| !b.iter().any(|y| *x == y)).collect()
}
