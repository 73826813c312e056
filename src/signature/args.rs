use std::fmt::Debug;

/// A tuple of positional arguments that can be rendered for a call signature.
pub trait ArgList {
    fn reprs(&self) -> Vec<String>;
}

/// Something that can be invoked once with a tuple of positional arguments.
pub trait Callable<Args> {
    type Output;

    fn call_with(self, args: Args) -> Self::Output;
}

macro_rules! impl_arg_tuple {
    ($($name:ident $idx:tt),*) => {
        impl<$($name: Debug),*> ArgList for ($($name,)*) {
            fn reprs(&self) -> Vec<String> {
                vec![$(format!("{:?}", self.$idx)),*]
            }
        }

        impl<Func, Out, $($name),*> Callable<($($name,)*)> for Func
        where
            Func: FnOnce($($name),*) -> Out,
        {
            type Output = Out;

            #[allow(non_snake_case)]
            fn call_with(self, args: ($($name,)*)) -> Out {
                let ($($name,)*) = args;
                self($($name),*)
            }
        }
    };
}

impl_arg_tuple!();
impl_arg_tuple!(A 0);
impl_arg_tuple!(A 0, B 1);
impl_arg_tuple!(A 0, B 1, C 2);
impl_arg_tuple!(A 0, B 1, C 2, D 3);
impl_arg_tuple!(A 0, B 1, C 2, D 3, E 4);
impl_arg_tuple!(A 0, B 1, C 2, D 3, E 4, F 5);

#[cfg(test)]
mod tests {
    use super::*;

    fn add(a: i32, b: i32) -> i32 {
        a + b
    }

    fn double(x: i32) -> i32 {
        x * 2
    }

    #[test]
    fn test_reprs_use_debug() {
        assert_eq!(("abc", 1, 'x').reprs(), vec!["\"abc\"", "1", "'x'"]);
        assert!(().reprs().is_empty());
    }

    #[test]
    fn test_call_with_tuple() {
        assert_eq!(add.call_with((2, 3)), 5);
        assert_eq!((|| "done").call_with(()), "done");
        assert_eq!(double.call_with((4,)), 8);
    }
}
