pub mod task_item;
