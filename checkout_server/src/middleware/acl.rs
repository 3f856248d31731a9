//! Access control list middleware for the checkout server.
//! This middleware can be placed on any route or service.
//!
//! It authenticates the session token on the incoming request and then checks the claims in the token against the
//! roles the route requires. Requests without a valid token get a 401 response; requests from users without the
//! required roles get a 403.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use checkout_engine::db_types::Role;
use futures::{
    future::{ok, Ready},
    Future,
};
use log::*;

use crate::{
    auth::authenticate,
    errors::{AuthError, ServerError},
};

pub struct AclMiddlewareFactory {
    required_roles: Vec<Role>,
}

impl AclMiddlewareFactory {
    pub fn new(required_roles: &[Role]) -> Self {
        AclMiddlewareFactory { required_roles: required_roles.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AclMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { required_roles: self.required_roles.clone(), service: Rc::new(service) })
    }
}

pub struct AclMiddlewareService<S> {
    required_roles: Vec<Role>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required_roles = self.required_roles.clone();
        Box::pin(async move {
            let claims = authenticate(req.request())?;
            if claims.has_roles(&required_roles) {
                service.call(req).await
            } else {
                warn!("🔐️ User #{} tried to access {} without the required roles", claims.user_id, req.path());
                let roles = required_roles.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(", ");
                Err(ServerError::from(AuthError::InsufficientPermissions(format!("Requires {roles}"))).into())
            }
        })
    }
}
