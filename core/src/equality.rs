use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    hash::{BuildHasher, Hash},
    rc::Rc,
    sync::Arc,
};

/// Structural, value-based equality used to match argument lists.
///
/// Unlike [`PartialEq`] for floats, `NaN` is considered equal to itself: two calls
/// made with the same `NaN` argument are the same call. Shared pointers compare
/// equal by identity first and by their pointees otherwise.
///
/// Owned Rust values cannot form cycles without interior mutability, which none of
/// the provided implementations look through, so recursion always terminates.
pub trait DeepEq {
    fn deep_eq(&self, other: &Self) -> bool;
}

/// Compares two ordered argument sequences element by element.
pub fn deep_eq_slices<T: DeepEq>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.deep_eq(b))
}

macro_rules! deep_eq_via_partial_eq {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DeepEq for $ty {
                #[inline]
                fn deep_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

deep_eq_via_partial_eq!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    str,
    String,
    std::time::Duration,
    std::path::Path,
    std::path::PathBuf,
);

macro_rules! deep_eq_float {
    ($($ty:ty),*) => {
        $(
            impl DeepEq for $ty {
                #[inline]
                fn deep_eq(&self, other: &Self) -> bool {
                    // -0.0 == 0.0 holds already
                    self == other || (self.is_nan() && other.is_nan())
                }
            }
        )*
    };
}

deep_eq_float!(f32, f64);

impl<T: DeepEq + ?Sized> DeepEq for &T {
    fn deep_eq(&self, other: &Self) -> bool {
        (**self).deep_eq(*other)
    }
}

impl<T: DeepEq + ?Sized> DeepEq for Box<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        (**self).deep_eq(other)
    }
}

impl<T: DeepEq + ?Sized> DeepEq for Arc<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other) || (**self).deep_eq(other)
    }
}

impl<T: DeepEq + ?Sized> DeepEq for Rc<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other) || (**self).deep_eq(other)
    }
}

impl<T: DeepEq> DeepEq for Option<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.deep_eq(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: DeepEq, E: DeepEq> DeepEq for Result<T, E> {
    fn deep_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Ok(a), Ok(b)) => a.deep_eq(b),
            (Err(a), Err(b)) => a.deep_eq(b),
            _ => false,
        }
    }
}

impl<T: DeepEq> DeepEq for [T] {
    fn deep_eq(&self, other: &Self) -> bool {
        deep_eq_slices(self, other)
    }
}

impl<T: DeepEq, const N: usize> DeepEq for [T; N] {
    fn deep_eq(&self, other: &Self) -> bool {
        deep_eq_slices(self, other)
    }
}

impl<T: DeepEq> DeepEq for Vec<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        deep_eq_slices(self, other)
    }
}

impl<K, V, S> DeepEq for HashMap<K, V, S>
where
    K: Eq + Hash,
    V: DeepEq,
    S: BuildHasher,
{
    fn deep_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |o| v.deep_eq(o)))
    }
}

impl<K: Ord, V: DeepEq> DeepEq for BTreeMap<K, V> {
    fn deep_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |o| v.deep_eq(o)))
    }
}

impl<T: Eq + Hash, S: BuildHasher> DeepEq for HashSet<T, S> {
    fn deep_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|x| other.contains(x))
    }
}

impl<T: Ord> DeepEq for BTreeSet<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|x| other.contains(x))
    }
}

macro_rules! deep_eq_tuple {
    ($($name:ident $idx:tt),+) => {
        impl<$($name: DeepEq),+> DeepEq for ($($name,)+) {
            fn deep_eq(&self, other: &Self) -> bool {
                $(self.$idx.deep_eq(&other.$idx))&&+
            }
        }
    };
}

deep_eq_tuple!(A 0);
deep_eq_tuple!(A 0, B 1);
deep_eq_tuple!(A 0, B 1, C 2);
deep_eq_tuple!(A 0, B 1, C 2, D 3);
deep_eq_tuple!(A 0, B 1, C 2, D 3, E 4);
deep_eq_tuple!(A 0, B 1, C 2, D 3, E 4, F 5);
deep_eq_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6);
deep_eq_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
