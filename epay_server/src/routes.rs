//! Request handler definitions
//!
//! Define each route and its handler here. The work itself lives in [`crate::payment_flow`]; handlers only dispatch
//! on the request `TYPE`.
//!
//! The `/v1/pay` routes must be wrapped in the checksum middleware, which supplies the [`VerifiedRequest`].
use actix_web::{get, web, HttpResponse, Responder};
use epay_billing::ClientFactory;
use epay_engine::PaymentOrderStore;
use log::*;

use crate::{
    data_objects::{RequestType, VerifiedRequest},
    errors::ServerError,
    payment_flow,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("OK")
}

//----------------------------------------------   Init  ----------------------------------------------------
route!(pay_init => Get "/init" impl PaymentOrderStore);
/// Route handler for `/v1/pay/init`
///
/// * `TYPE=CHECK&IDN=..` returns what the subscriber owes, in minor units.
/// * `TYPE=BILLING&IDN=..&AMOUNT=..` creates a payment order and returns its `TID`.
pub async fn pay_init<S: PaymentOrderStore>(
    request: web::ReqData<VerifiedRequest>,
    factory: web::Data<ClientFactory<S>>,
) -> Result<HttpResponse, ServerError> {
    let request = request.into_inner();
    let response = match request.request_type()? {
        RequestType::Check => {
            trace!("💻️ Received bill check request");
            payment_flow::check_bill(&request, factory.as_ref()).await?
        },
        RequestType::Billing => {
            trace!("💻️ Received payment order request");
            payment_flow::create_payment_order(&request, factory.as_ref()).await?
        },
    };
    Ok(HttpResponse::Ok().json(response))
}

//----------------------------------------------   Confirm  ----------------------------------------------------
route!(pay_confirm => Get "/confirm" impl PaymentOrderStore);
/// Route handler for `/v1/pay/confirm`. Only `TYPE=BILLING` is meaningful here.
pub async fn pay_confirm<S: PaymentOrderStore>(
    request: web::ReqData<VerifiedRequest>,
    factory: web::Data<ClientFactory<S>>,
) -> Result<HttpResponse, ServerError> {
    let request = request.into_inner();
    match request.request_type()? {
        RequestType::Billing => {
            trace!("💻️ Received payment confirmation");
            let response = payment_flow::confirm_payment_order(&request, factory.as_ref()).await?;
            Ok(HttpResponse::Ok().json(response))
        },
        RequestType::Check => {
            Err(ServerError::InvalidRequest("Payment orders cannot be confirmed with TYPE=CHECK".to_string()))
        },
    }
}
