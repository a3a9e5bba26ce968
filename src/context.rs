//! The central simulation object.
//!
//! A `Context` owns every piece of model state through typed data plugins and
//! advances time by running plans in order. Model modules extend it through
//! `Context*Ext` traits rather than by holding state of their own.
use std::any::{Any, TypeId};
use std::rc::Rc;

use log::trace;

use crate::hashing::HashMap;
use crate::plan::{ExecutionPhase, Queue};

/// A type that owns one container of data inside a `Context`.
///
/// Use `define_data_plugin!` rather than implementing this by hand.
pub trait DataPlugin: Any {
    type DataContainer;

    fn create_data_container() -> Self::DataContainer;
}

/// Defines a new type for storing data in `Context`.
#[macro_export]
macro_rules! define_data_plugin {
    ($plugin:ident, $data_container:ty, $default: expr) => {
        struct $plugin;

        impl $crate::context::DataPlugin for $plugin {
            type DataContainer = $data_container;

            fn create_data_container() -> Self::DataContainer {
                $default
            }
        }
    };
}
pub use define_data_plugin;

type Callback = dyn FnOnce(&mut Context);

pub struct Context {
    plan_queue: Queue<Box<Callback>>,
    data_plugins: HashMap<TypeId, Box<dyn Any>>,
    current_time: f64,
    shutdown_requested: bool,
}

impl Context {
    #[must_use]
    pub fn new() -> Context {
        Context {
            plan_queue: Queue::new(),
            data_plugins: HashMap::default(),
            current_time: 0.0,
            shutdown_requested: false,
        }
    }

    /// Schedule `callback` to run at `time` in the `Normal` phase.
    ///
    /// # Panics
    ///
    /// Panics if `time` is NaN, infinite, or earlier than the current time.
    pub fn add_plan(&mut self, time: f64, callback: impl FnOnce(&mut Context) + 'static) {
        self.add_plan_with_phase(time, callback, ExecutionPhase::Normal);
    }

    /// Schedule `callback` to run at `time` in the given phase.
    ///
    /// # Panics
    ///
    /// Panics if `time` is NaN, infinite, or earlier than the current time.
    pub fn add_plan_with_phase(
        &mut self,
        time: f64,
        callback: impl FnOnce(&mut Context) + 'static,
        phase: ExecutionPhase,
    ) {
        assert!(
            !time.is_nan() && !time.is_infinite() && time >= self.current_time,
            "Invalid time value"
        );
        self.plan_queue.add_plan(time, Box::new(callback), phase);
    }

    /// Run `callback` every `period` starting now, for as long as other plans
    /// remain in the queue. A periodic plan therefore never keeps a simulation
    /// alive on its own.
    ///
    /// # Panics
    ///
    /// Panics if `period` is not a positive, finite number.
    pub fn add_periodic_plan_with_phase(
        &mut self,
        period: f64,
        callback: impl Fn(&mut Context) + 'static,
        phase: ExecutionPhase,
    ) {
        assert!(
            period > 0.0 && period.is_finite(),
            "Period must be greater than 0"
        );
        let start = self.current_time;
        self.schedule_periodic_plan(start, period, Rc::new(callback), phase);
    }

    fn schedule_periodic_plan(
        &mut self,
        time: f64,
        period: f64,
        callback: Rc<dyn Fn(&mut Context)>,
        phase: ExecutionPhase,
    ) {
        self.add_plan_with_phase(
            time,
            move |context| {
                callback(context);
                if context.plan_queue.pending() > 0 {
                    context.schedule_periodic_plan(time + period, period, callback, phase);
                }
            },
            phase,
        );
    }

    /// Stop `execute` once the current plan returns. Remaining plans are
    /// dropped, and a later `execute` runs whatever is scheduled after that.
    pub fn shutdown(&mut self) {
        trace!("shutdown requested at t={}", self.current_time);
        self.shutdown_requested = true;
    }

    fn add_plugin<T: DataPlugin>(&mut self) {
        self.data_plugins
            .insert(TypeId::of::<T>(), Box::new(T::create_data_container()));
    }

    /// Returns the data container for `T`, creating it on first use.
    #[allow(clippy::missing_panics_doc)]
    pub fn get_data_container_mut<T: DataPlugin>(&mut self, _plugin: T) -> &mut T::DataContainer {
        let type_id = TypeId::of::<T>();
        if !self.data_plugins.contains_key(&type_id) {
            self.add_plugin::<T>();
        }
        self.data_plugins
            .get_mut(&type_id)
            .and_then(|boxed| boxed.downcast_mut::<T::DataContainer>())
            .expect("data plugin container has the wrong type")
    }

    /// Returns the data container for `T`, or `None` if nothing created it yet.
    #[must_use]
    pub fn get_data_container<T: DataPlugin>(&self, _plugin: T) -> Option<&T::DataContainer> {
        self.data_plugins
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T::DataContainer>())
    }

    #[must_use]
    pub fn get_current_time(&self) -> f64 {
        self.current_time
    }

    /// Run plans until the queue is empty or `shutdown` is called.
    pub fn execute(&mut self) {
        trace!("entering event loop");
        loop {
            if self.shutdown_requested {
                self.plan_queue.clear();
                self.shutdown_requested = false;
                break;
            }

            if let Some(plan) = self.plan_queue.get_next_plan() {
                self.current_time = plan.time;
                (plan.data)(self);
            } else {
                break;
            }
        }
        trace!("event loop finished at t={}", self.current_time);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    define_data_plugin!(ComponentA, Vec<u32>, vec![]);

    fn add_plan(context: &mut Context, time: f64, value: u32) {
        context.add_plan(time, move |context| {
            context.get_data_container_mut(ComponentA).push(value);
        });
    }

    fn recorded(context: &Context) -> Vec<u32> {
        context
            .get_data_container(ComponentA)
            .cloned()
            .unwrap_or_default()
    }

    #[test]
    #[should_panic(expected = "Invalid time value")]
    fn negative_plan_time() {
        let mut context = Context::new();
        add_plan(&mut context, -1.0, 0);
    }

    #[test]
    #[should_panic(expected = "Invalid time value")]
    fn nan_plan_time() {
        let mut context = Context::new();
        add_plan(&mut context, f64::NAN, 0);
    }

    #[test]
    fn empty_context() {
        let mut context = Context::new();
        context.execute();
        assert_eq!(context.get_current_time(), 0.0);
        assert!(context.get_data_container(ComponentA).is_none());
    }

    #[test]
    fn phases_order_plans_at_same_time() {
        let mut context = Context::new();
        context.add_plan_with_phase(
            1.0,
            |context| context.get_data_container_mut(ComponentA).push(3),
            ExecutionPhase::Last,
        );
        add_plan(&mut context, 1.0, 2);
        context.add_plan_with_phase(
            1.0,
            |context| context.get_data_container_mut(ComponentA).push(1),
            ExecutionPhase::First,
        );
        context.execute();
        assert_eq!(recorded(&context), vec![1, 2, 3]);
    }

    #[test]
    fn periodic_plan_stops_when_queue_drains() {
        let mut context = Context::new();
        context.add_periodic_plan_with_phase(
            1.0,
            |context| {
                let now = context.get_current_time() as u32;
                context.get_data_container_mut(ComponentA).push(now);
            },
            ExecutionPhase::Normal,
        );
        add_plan(&mut context, 3.0, 100);
        context.execute();
        assert_eq!(recorded(&context), vec![0, 1, 2, 100, 3]);
    }

    #[test]
    fn shutdown_drops_remaining_plans() {
        let mut context = Context::new();
        add_plan(&mut context, 1.0, 1);
        context.add_plan(2.0, Context::shutdown);
        add_plan(&mut context, 3.0, 3);
        context.execute();
        assert_eq!(context.get_current_time(), 2.0);
        assert_eq!(recorded(&context), vec![1]);
    }

    #[test]
    fn execute_after_shutdown_runs_new_plans() {
        let mut context = Context::new();
        add_plan(&mut context, 1.0, 1);
        context.add_plan(2.0, Context::shutdown);
        add_plan(&mut context, 3.0, 3);
        context.execute();

        add_plan(&mut context, 4.0, 4);
        context.execute();
        assert_eq!(context.get_current_time(), 4.0);
        assert_eq!(recorded(&context), vec![1, 4]);
    }
}
