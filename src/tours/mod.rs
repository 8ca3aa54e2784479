//! # Tours API
//!
//! Tour CRUD, the top-tours alias and the two statistics endpoints.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /api/v1/tours` | [`TourHandler::list`] |
//! | `POST /api/v1/tours` | [`TourHandler::create`] |
//! | `GET /api/v1/tours/top-5-cheap` | [`TourHandler::top_tours`] |
//! | `GET /api/v1/tours/tour-stats` | [`TourHandler::stats`] |
//! | `GET /api/v1/tours/monthly-plan/:year` | [`TourHandler::monthly_plan`] |
//! | `GET /api/v1/tours/:id` | [`TourHandler::get_one`] |
//! | `PATCH /api/v1/tours/:id` | [`TourHandler::update`] |
//! | `DELETE /api/v1/tours/:id` | [`TourHandler::delete`] |

mod errors;
mod handler;
mod model;
mod response;
mod routes;

pub use errors::{ApiError, ApiResult, GENERIC_FAILURE_MESSAGE};
pub use handler::{alias_top_tours, parse_year, TourHandler, MAX_PLAN_YEAR, MIN_PLAN_YEAR};
pub use model::{
    tour_schema, tour_store, DIFFICULTIES, TOP_TOURS_FIELDS, TOP_TOURS_LIMIT, TOP_TOURS_SORT,
};
pub use response::{Envelope, ErrorBody, Status};
pub use routes::{route_not_found, tour_routes, TOURS_PATH};
