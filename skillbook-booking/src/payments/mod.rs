pub mod razorpay;

pub use razorpay::PaymentGateway;
